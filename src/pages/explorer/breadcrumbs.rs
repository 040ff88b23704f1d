use serde::Serialize;

pub const HOME_LABEL: &str = "Home";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// Trail from `root_path` ("Home") to `path`, one crumb per segment, each
/// pointing at the cumulative path up to that segment.
///
/// When `path` lies under `root_path` only the segments below the root are
/// listed.
pub fn generate_breadcrumbs(path: &str, root_path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        name: HOME_LABEL.to_string(),
        path: root_path.to_string(),
    }];
    if path == root_path {
        return crumbs;
    }

    let base = root_path.trim_end_matches('/');
    let relative = if base.is_empty() {
        path
    } else {
        match path.strip_prefix(base) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    };

    let mut current = base.to_string();
    for part in relative.split('/').filter(|p| !p.is_empty()) {
        current.push('/');
        current.push_str(part);
        crumbs.push(Breadcrumb {
            name: part.to_string(),
            path: current.clone(),
        });
    }
    crumbs
}
