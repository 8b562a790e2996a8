fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 告诉Cargo如果proto文件发生变化，就重新运行此构建脚本
    println!("cargo:rerun-if-changed=proto/");

    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    // 定义所有proto文件，movie.proto依赖metadata.proto，需要一起编译
    let proto_files = ["rating.proto", "metadata.proto", "movie.proto"]
        .iter()
        .map(|file| format!("proto/{}", file))
        .collect::<Vec<_>>();

    // 编译所有proto文件并生成文件描述符集
    tonic_build::configure()
        .build_client(true) // 生成客户端代码
        .build_server(true) // 生成服务器代码
        .file_descriptor_set_path(format!(
            "{}/services_descriptor.bin",
            std::env::var("OUT_DIR")?
        ))
        .compile(&proto_files, &["proto"])?;

    Ok(())
}
