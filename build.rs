use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // The FTDI libraries are only needed by the FT232H transport
    if env::var_os("CARGO_FEATURE_FTDI").is_none() {
        return;
    }

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let project_root = PathBuf::from(&manifest_dir);
    let shared_root = project_root.parent().unwrap_or(&project_root).to_path_buf();

    // Path to MPSSE DLL (Win32/32-bit)
    let mpsse_lib_path = shared_root.join("FTDI MPSSE").join("build").join("Win32").join("DLL");

    // Path to D2XX DLL
    let d2xx_lib_path = shared_root.join("FTDI-D2XX-Drivers-Win-2.12.36.20U").join("x86");

    println!("cargo:rustc-link-search=native={}", mpsse_lib_path.display());
    println!("cargo:rustc-link-search=native={}", d2xx_lib_path.display());

    // libmpsse.dll loads FTD2XX.dll at runtime
    println!("cargo:rustc-link-lib=dylib=libmpsse");

    println!("cargo:rerun-if-changed=../FTDI MPSSE/build/Win32/DLL/libmpsse.dll");
    println!("cargo:rerun-if-changed=../FTDI-D2XX-Drivers-Win-2.12.36.20U/x86/FTD2XX.dll");

    // Copy the runtime DLLs next to the reader executable
    if let Ok(profile) = env::var("PROFILE") {
        let target_dir = project_root
            .join("target")
            .join("i686-pc-windows-msvc")
            .join(&profile);

        if target_dir.exists() {
            let _ = fs::copy(mpsse_lib_path.join("libmpsse.dll"), target_dir.join("libmpsse.dll"));
            let _ = fs::copy(d2xx_lib_path.join("FTD2XX.dll"), target_dir.join("FTD2XX.dll"));

            println!("cargo:warning=Copied runtime DLLs to {}", target_dir.display());
        }
    }
}
