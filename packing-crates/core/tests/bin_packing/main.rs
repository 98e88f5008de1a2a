#![cfg(test)]

mod random_instances;
mod scenarios;
mod search;
