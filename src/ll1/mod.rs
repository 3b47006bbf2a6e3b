/*
    This module builds LL(1) parsing tables and runs the table driven
    predictive parser on a token string
*/

pub mod simulate;
pub mod table;
