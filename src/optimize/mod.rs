/*
    Source-level optimizations
*/

pub mod dead_code;
