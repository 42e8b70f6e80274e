mod common;
mod index;
mod resolver;
