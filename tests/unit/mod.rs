mod basic_tests;
mod streak_properties;
