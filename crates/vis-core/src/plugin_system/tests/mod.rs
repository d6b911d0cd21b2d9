
mod loader_tests;
