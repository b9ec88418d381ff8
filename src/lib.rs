//! Bookstore application library
//!
//! Book CRUD endpoints over two independent stores, wired together by the
//! module registry.

pub mod bootstrap;
pub mod modules;
