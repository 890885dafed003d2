//! UniFFI bindgen CLI tool for generating Swift and Kotlin bindings.
//!
//! ```bash
//! cargo run --features uniffi-cli --bin uniffi-bindgen generate \
//!     --library target/release/libdessert_browser.so --language swift --out-dir ./bindings
//! ```

fn main() {
    uniffi::uniffi_bindgen_main()
}
