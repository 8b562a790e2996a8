// 所有服务共用的文件描述符集，用于gRPC反射
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("services_descriptor");

// 导入生成的gRPC服务代码
pub mod rating {
    tonic::include_proto!("rating");
}

pub mod metadata {
    tonic::include_proto!("metadata");
}

pub mod movie {
    tonic::include_proto!("movie");
}
