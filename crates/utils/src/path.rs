// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Separator used by object keys and bucket paths, independent of the host platform.
pub const SLASH_SEPARATOR: &str = "/";

/// path_join_buf joins object path elements with `/` and cleans the result.
///
/// Empty elements are skipped, `.` segments are dropped and `..` pops the previous
/// segment. A trailing slash on the last element is preserved so prefixes stay prefixes.
pub fn path_join_buf(elements: &[&str]) -> String {
    let trailing_slash = elements.last().is_some_and(|last| last.ends_with(SLASH_SEPARATOR));
    let rooted = elements
        .iter()
        .find(|e| !e.is_empty())
        .is_some_and(|first| first.starts_with(SLASH_SEPARATOR));

    let joined = elements.iter().filter(|e| !e.is_empty()).copied().collect::<Vec<_>>().join(SLASH_SEPARATOR);
    let mut cleaned = clean(&joined);

    if rooted && !cleaned.starts_with(SLASH_SEPARATOR) {
        cleaned.insert_str(0, SLASH_SEPARATOR);
    }
    if trailing_slash && !cleaned.ends_with(SLASH_SEPARATOR) {
        cleaned.push_str(SLASH_SEPARATOR);
    }
    cleaned
}

/// clean returns the shortest path equivalent to `path` by purely lexical processing.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with(SLASH_SEPARATOR);
    let mut parts: Vec<&str> = Vec::new();
    for seg in path.split(SLASH_SEPARATOR) {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            _ => parts.push(seg),
        }
    }

    let body = parts.join(SLASH_SEPARATOR);
    match (rooted, body.is_empty()) {
        (true, _) => format!("{SLASH_SEPARATOR}{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}
