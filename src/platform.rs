//! Host platform naming conventions for the staged artifact.

/// File name of the pccl shared library on the host platform.
pub fn shared_library_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "pccl.dll"
    } else if cfg!(target_os = "macos") {
        "libpccl.dylib"
    } else {
        "libpccl.so"
    }
}
