mod db_test;
mod permission_test;
