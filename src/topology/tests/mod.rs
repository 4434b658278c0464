mod dependents_tests;
mod invariants;
