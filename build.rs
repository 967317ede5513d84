//! Build script for license-manager
//!
//! Migrations are embedded with `sqlx::migrate!`, so a changed or added
//! migration must trigger a rebuild.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
