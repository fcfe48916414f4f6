//! Integration tests for Sumi-Recon

mod crawl_tests;
