mod fixture;

mod remote_tests;
mod workflow_tests;
