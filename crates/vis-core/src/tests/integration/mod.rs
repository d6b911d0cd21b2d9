mod common;
mod lifecycle_tests;
mod navigation_tests;
