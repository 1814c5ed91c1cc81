//! 基础设施层。
//!
//! 应用层抽象的具体适配器实现，目前只有基于文件的历史快照存储。

pub mod snapshot;

pub use snapshot::FileSnapshotStore;
