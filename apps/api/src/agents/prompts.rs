// Prompt templates for the enrichment agents
//
// Templates are versioned so transcripts can be traced back to the exact
// wording the model saw. Variables use `{{name}}` placeholders.

use std::collections::HashMap;

/// Prompt template structure
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
    pub user_template: String,
}

impl PromptTemplate {
    /// `name@version`, as recorded in run logs
    pub fn label(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// Render the user template with variables
    ///
    /// Single pass: substituted values are never re-scanned, and unknown
    /// placeholders are left untouched.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut rendered = String::with_capacity(self.user_template.len());
        let mut rest = self.user_template.as_str();

        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match variables.get(key.trim()) {
                        Some(value) => rendered.push_str(value),
                        None => {
                            rendered.push_str("{{");
                            rendered.push_str(key);
                            rendered.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    rendered.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        rendered.push_str(rest);
        rendered
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn repo_analyzer() -> PromptTemplate {
        PromptTemplate {
            name: "repo_analyzer".to_string(),
            version: "1.0.0".to_string(),
            system: REPO_ANALYZER_SYSTEM.to_string(),
            user_template: String::new(),
        }
    }

    pub fn ticket_comment() -> PromptTemplate {
        PromptTemplate {
            name: "ticket_comment".to_string(),
            version: "1.0.0".to_string(),
            system: TICKET_COMMENT_SYSTEM.to_string(),
            user_template: String::new(),
        }
    }

    /// Initial human instruction that opens every run
    pub fn initial_instruction() -> PromptTemplate {
        PromptTemplate {
            name: "initial_instruction".to_string(),
            version: "1.0.0".to_string(),
            system: String::new(),
            user_template: "You have {{owner}}/{{repo}} cloned at your current working directory. \
                            You have a linear ticket with id `{{id}}`, title `{{title}}` and \
                            description `{{description}}`. Your task is to find what files would \
                            be a good starting point to solve this issue. Also enrich the ticket \
                            with a comment that is helpful."
                .to_string(),
        }
    }

    const REPO_ANALYZER_SYSTEM: &str = "\
You are a software engineer assigned to enrich tickets with useful information about the
repository. Use the repo-analyzer tools to fetch information about the repository and find the
files and information that are relevant to the ticket. You are given the title and description
of the ticket. Provide insights about the codebase that are relevant to the ticket, in addition
to the files that may be a good starting point to solve it.

You have access to the following tools:
- `CODE_ANALYSIS_TOOL_GET_CLASS_INFO`: Fetch information about a class in the repository.
- `CODE_ANALYSIS_TOOL_GET_METHOD_BODY`: Fetch the body of a method in the repository.
- `CODE_ANALYSIS_TOOL_GET_METHOD_SIGNATURE`: Fetch the signature of a method in the repository.
- `CODE_ANALYSIS_TOOL_GET_RELEVANT_CODE`: Fetch code snippets from the repository relevant to a query.
- `FILETOOL_OPEN_FILE`: Open a file in the repository and view its contents (100 lines at a time).
- `FILETOOL_SCROLL`: Scroll through the open file.
- `FILETOOL_SEARCH_WORD`: Search for a word in the repository.
- `FILETOOL_LIST_FILES`: List the files in the repository.
- `FILETOOL_FIND_FILE`: Find a file in the repository.

Approach:
1. Use the `CODE_ANALYSIS_TOOL` actions to look up classes, methods and snippets that might be
   relevant to the ticket.
2. To view a file, use `FILETOOL_OPEN_FILE` and navigate it with `FILETOOL_SCROLL`.
3. Use the other `FILETOOL` actions to navigate the repository and search for more information.

Keep calling the tools until you have enough context about the codebase for this ticket.
Once you have it, respond with \"ANALYSIS COMPLETED\" together with a concise summary of what you
found that is relevant to the ticket.
NOTE: LIST THE RELEVANT FILENAMES IN THE SUMMARY.
";

    const TICKET_COMMENT_SYSTEM: &str = "\
You are a software engineer assigned to enrich a ticket with useful information. The
conversation so far contains information about the codebase that is relevant to the ticket.
Summarise it concisely and add it as a comment on the ticket, including the relevant files as
a list so developers understand the context of the ticket.

NOTE: YOU ALREADY HAVE ALL THE INFORMATION REQUIRED TO USE `LINEAR_CREATE_LINEAR_COMMENT`.

You have access to the following tool:
- `LINEAR_CREATE_LINEAR_COMMENT`: Create a comment on a Linear ticket. The ticket id is given at
  the start of the conversation.

NOTE: CALL `LINEAR_CREATE_LINEAR_COMMENT` ONLY ONCE, WITH THE SUMMARY OF WHAT WAS FOUND.

NOTE: BE CONCISE AND TO THE POINT WHILE COMMENTING.

Once you're done commenting on the ticket, respond with \"REVIEW COMPLETED\".
";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_substitutes_variables() {
        let rendered = library::initial_instruction().render(&vars(&[
            ("owner", "ComposioHQ"),
            ("repo", "composio"),
            ("id", "T-1"),
            ("title", "Bug X"),
            ("description", "desc"),
        ]));

        assert!(rendered.starts_with("You have ComposioHQ/composio cloned"));
        assert!(rendered.contains("id `T-1`, title `Bug X` and description `desc`"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let template = PromptTemplate {
            name: "t".to_string(),
            version: "1".to_string(),
            system: String::new(),
            user_template: "{{a}} and {{b}}".to_string(),
        };

        assert_eq!(template.render(&vars(&[("a", "x")])), "x and {{b}}");
    }

    #[test]
    fn render_does_not_rescan_values() {
        let rendered = library::initial_instruction().render(&vars(&[
            ("owner", "o"),
            ("repo", "r"),
            ("id", "T-2"),
            ("title", "{{description}}"),
            ("description", "real"),
        ]));

        assert!(rendered.contains("title `{{description}}`"));
    }

    #[test]
    fn system_prompts_name_their_markers() {
        assert!(library::repo_analyzer().system.contains("ANALYSIS COMPLETED"));
        assert!(library::ticket_comment().system.contains("REVIEW COMPLETED"));
    }

    #[test]
    fn labels_carry_version() {
        assert_eq!(library::repo_analyzer().label(), "repo_analyzer@1.0.0");
        assert_eq!(library::ticket_comment().label(), "ticket_comment@1.0.0");
    }
}
