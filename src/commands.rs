/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "library",
    aliases: &["l", "lib", "stories"],
    description: "Browse the story library",
  },
  Command {
    name: "generate",
    aliases: &["g", "gen", "new"],
    description: "Generate a new story",
  },
  Command {
    name: "refresh",
    aliases: &["re", "reload"],
    description: "Refetch the library, bypassing the cache",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit sg9s",
  },
];

/// Match rank for a command against user input; lower is better, `None`
/// means no match.
fn match_rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    return Some(0);
  }
  if cmd.aliases.contains(&input) {
    return Some(1);
  }
  if cmd.name.starts_with(input) || cmd.aliases.iter().any(|a| a.starts_with(input)) {
    return Some(2);
  }
  if cmd.name.contains(input) {
    return Some(3);
  }
  None
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();

  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input).map(|rank| (cmd, rank)))
    .collect();

  matches.sort_by_key(|(_, rank)| *rank);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match_ranks_first() {
    let suggestions = get_suggestions("library");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "library");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("g");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "generate");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("ref");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_substring_match() {
    let suggestions = get_suggestions("brar");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "library");
  }

  #[test]
  fn test_no_match_is_empty() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
