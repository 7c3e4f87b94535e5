use std::env;
use std::path::PathBuf;

const SERVER_PROTO: &str = "../../proto/server.proto";
const PROTO_INCLUDE_DIR: &str = "../../proto/";
const SERVER_DESCRIPTOR_FILE: &str = "server_descriptor.bin";

fn main() {
    compile_protos();
}

/// Generates the typed `server` messages and writes the descriptor set the
/// runtime schema registry is loaded from.
fn compile_protos() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    prost_build::Config::new()
        .file_descriptor_set_path(out_dir.join(SERVER_DESCRIPTOR_FILE))
        .compile_protos(&[SERVER_PROTO], &[PROTO_INCLUDE_DIR])
        .unwrap();

    println!("cargo:rerun-if-changed={SERVER_PROTO}");
}
