use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Open(String),
    More,
    Clear,
    Help,
    Quit,
}

pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.strip_prefix(':').unwrap_or(input).trim();

    if input.is_empty() {
        return None;
    }

    let (cmd, args) = match input.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, args.trim()),
        None => (input, ""),
    };

    match cmd {
        "search" | "s" if !args.is_empty() => Some(Command::Search(args.to_owned())),
        "open" if !args.is_empty() => Some(Command::Open(args.to_owned())),
        "more" | "n" => Some(Command::More),
        "clear" => Some(Command::Clear),
        "help" | "h" => Some(Command::Help),
        "quit" | "q" => Some(Command::Quit),
        _ => None,
    }
}

/// Extract the search term from a front-end location.
///
/// Accepts full URLs (`https://host/search?q=cats`), paths (`/search?q=cats`)
/// and bare query strings (`?q=cats`). Anything that is not a location is
/// taken as the term itself.
pub fn term_from_location(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let is_location = trimmed.starts_with('/')
        || trimmed.starts_with('?')
        || trimmed.starts_with("http://")
        || trimmed.starts_with("https://");
    if !is_location {
        return Some(trimmed.to_owned());
    }

    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(trimmed).ok()?;

    url.query_pairs()
        .find(|(name, _)| name == "q")
        .map(|(_, value)| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
