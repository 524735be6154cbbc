/// Parse the free-text groups field into the group set shared by a batch.
///
/// Splits on commas, trims each piece and drops empty entries. Order is kept
/// and duplicates are passed through untouched.
pub fn parse_groups(groups_text: &str) -> Vec<String> {
    groups_text
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
