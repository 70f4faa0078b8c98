/// ILIKE pattern matching `name` anywhere in the kingdom name. LIKE wildcards
/// in the input are escaped so they match literally.
pub fn name_search_pattern(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push('%');
    for c in name.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
