use super::maintainers::Maintainers;

/// The upstream overlay. Only here do maintainer handles become `@` mentions,
/// so that forks running the same workflow don't notify anyone.
pub const CANONICAL_REPOSITORY: &str = "microcai/gentoo-zh";

/// Returns true when `repo_full_name` is the canonical upstream repository
pub fn is_canonical_repository(repo_full_name: &str) -> bool {
    repo_full_name == CANONICAL_REPOSITORY
}

/// The search key shared by every issue filed for `package`
pub fn title_prefix(package: &str) -> String {
    format!("[nvchecker] {package} can be bump to ")
}

/// The desired title and body of the tracking issue for one version bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDraft {
    pub package: String,
    pub title: String,
    pub body: String,
}

impl IssueDraft {
    pub fn new(
        package: &str,
        oldver: &str,
        newver: &str,
        maintainers: Option<&Maintainers>,
        mention: bool,
    ) -> IssueDraft {
        let mut body = String::new();
        if !oldver.is_empty() {
            body.push_str("oldver: ");
            body.push_str(oldver);
        }
        if let Some(maintainers) = maintainers {
            body.push_str(&cc_block(maintainers, mention));
        }

        IssueDraft {
            package: package.to_string(),
            title: format!("{}{newver}", title_prefix(package)),
            body,
        }
    }

    pub fn title_prefix(&self) -> String {
        title_prefix(&self.package)
    }
}

fn cc_block(maintainers: &Maintainers, mention: bool) -> String {
    let render = |handle: &str| {
        if mention {
            format!("@{handle}")
        } else {
            handle.to_string()
        }
    };

    match maintainers {
        Maintainers::Single(handle) => format!("\nCC: {}", render(handle)),
        Maintainers::Multiple(handles) if handles.is_empty() => String::new(),
        Maintainers::Multiple(_) => {
            let mut block = String::from("\nCC:");
            for handle in maintainers.handles() {
                block.push(' ');
                block.push_str(&render(handle));
            }
            block
        }
    }
}
