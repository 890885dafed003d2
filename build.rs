fn main() {
    // Bindings come from the proc-macros in src/uniffi_bindings.rs, no UDL file
    println!("cargo:rerun-if-changed=src/uniffi_bindings.rs");
    println!("cargo:rerun-if-changed=build.rs");
}
