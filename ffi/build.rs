use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()));
    let Ok(out_dir) = env::var("OUT_DIR").map(PathBuf::from) else {
        println!("cargo:warning=OUT_DIR not set, skipping C header generation");
        return;
    };
    let header = out_dir.join("adgen_ffi.h");

    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("ADGEN_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(&header);
        }
        Err(e) => println!("cargo:warning=skipping C header generation: {e}"),
    }
}
