mod base_url_tests;
