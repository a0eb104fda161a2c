use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ManageEverything,
    ManagePostsAndComments,
    ManageSettings,
}

/// 版主在某个话题下的权限集合。
///
/// 只能通过构造函数得到，构造时统一做归一化：`manage_everything` 为真时
/// 另外两项也强制为真。反序列化同样走这一步，所以不存在
/// `can_manage_everything = true` 而 `can_manage_posts_and_comments = false` 的值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCapabilities")]
pub struct Capabilities {
    can_manage_everything: bool,
    can_manage_posts_and_comments: bool,
    can_manage_settings: bool,
}

#[derive(Deserialize)]
struct RawCapabilities {
    #[serde(default)]
    can_manage_everything: bool,
    #[serde(default)]
    can_manage_posts_and_comments: bool,
    #[serde(default)]
    can_manage_settings: bool,
}

impl From<RawCapabilities> for Capabilities {
    fn from(raw: RawCapabilities) -> Self {
        Self::new(
            raw.can_manage_everything,
            raw.can_manage_posts_and_comments,
            raw.can_manage_settings,
        )
    }
}

impl Capabilities {
    pub fn new(everything: bool, posts_and_comments: bool, settings: bool) -> Self {
        Self {
            can_manage_everything: everything,
            can_manage_posts_and_comments: everything || posts_and_comments,
            can_manage_settings: everything || settings,
        }
    }

    pub fn all() -> Self {
        Self::new(true, true, true)
    }

    pub fn from_set(caps: &[Capability]) -> Self {
        Self::new(
            caps.contains(&Capability::ManageEverything),
            caps.contains(&Capability::ManagePostsAndComments),
            caps.contains(&Capability::ManageSettings),
        )
    }

    pub fn grants(&self, required: Capability) -> bool {
        match required {
            Capability::ManageEverything => self.can_manage_everything,
            Capability::ManagePostsAndComments => {
                self.can_manage_everything || self.can_manage_posts_and_comments
            }
            Capability::ManageSettings => self.can_manage_everything || self.can_manage_settings,
        }
    }

    pub fn can_manage_everything(&self) -> bool {
        self.can_manage_everything
    }

    pub fn can_manage_posts_and_comments(&self) -> bool {
        self.can_manage_posts_and_comments
    }

    pub fn can_manage_settings(&self) -> bool {
        self.can_manage_settings
    }
}
