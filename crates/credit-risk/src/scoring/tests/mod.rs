mod common;
mod dataset;
mod validation;
