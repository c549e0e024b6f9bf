//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "build"
//! irh_type: "source"
//! irh_scope: "build"
//! irh_description: "Compiles the gateway protobuf definitions."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
fn main() {
    let protoc = protoc_bin_vendored::protoc_bin_path().expect("failed to locate protoc");
    std::env::set_var("PROTOC", protoc);

    println!("cargo:rerun-if-changed=proto/gateway.proto");
    println!("cargo:rerun-if-changed=proto");

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile(&["proto/gateway.proto"], &["proto"])
        .expect("failed to compile gateway definitions");
}
