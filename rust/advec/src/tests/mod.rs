mod exception_safety_tests;
