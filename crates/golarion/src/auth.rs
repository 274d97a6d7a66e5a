//! コマンド実行者の管理者判定。

use crate::config::DiscordConfig;

/// コマンドを実行したユーザーの情報。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invoker {
    pub user_id: u64,
    /// ギルドの管理者権限を持っているか
    pub administrator: bool,
    /// 付与されているロール名
    pub role_names: Vec<String>,
}

/// 管理者権限、管理者ロール、設定ファイルの管理者リストのいずれかに該当すれば管理者とみなす。
pub fn is_admin(config: &DiscordConfig, invoker: &Invoker) -> bool {
    invoker.administrator
        || config.admins.contains(&invoker.user_id)
        || invoker
            .role_names
            .iter()
            .any(|name| *name == config.admin_role)
}
