mod common;

mod clean_tests;
mod init_tests;
mod plan_tests;
mod run_tests;
