pub mod investor;
pub mod overall;
pub mod pages;
pub mod startup;
pub mod system;
