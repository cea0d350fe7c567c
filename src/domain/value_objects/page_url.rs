use url::Url;

pub const ROW_LIMIT_PARAM: &str = "limit";

/// Returns `page` with its `limit` query parameter set to `limit`.
///
/// An existing `limit` keeps its position; repeated ones collapse into one.
/// Every other parameter is preserved in order.
pub fn with_row_limit(page: &Url, limit: u32) -> Url {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;

    for (key, value) in page.query_pairs() {
        if key == ROW_LIMIT_PARAM {
            if !replaced {
                pairs.push((key.into_owned(), limit.to_string()));
                replaced = true;
            }
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }

    if !replaced {
        pairs.push((ROW_LIMIT_PARAM.to_string(), limit.to_string()));
    }

    let mut rewritten = page.clone();
    rewritten.query_pairs_mut().clear().extend_pairs(pairs);
    rewritten
}

/// Reads the current `limit` parameter, if it is present and numeric.
pub fn row_limit(page: &Url) -> Option<u32> {
    page.query_pairs()
        .find(|(key, _)| key == ROW_LIMIT_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}
