mod materialize_tests;
