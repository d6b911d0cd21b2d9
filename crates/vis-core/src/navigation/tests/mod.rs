mod item_tests;
