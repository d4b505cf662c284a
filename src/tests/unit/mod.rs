mod controller_tests;
mod scenario_tests;
