// Catalogue of actions the pipeline can invoke
//
// Each action carries the schema shown to the model. The `thought` field is
// added later by the schema processor, not here.

use serde_json::{json, Value};

/// Application an action belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum App {
    FileTool,
    CodeAnalysis,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CodeAnalysisGetClassInfo,
    CodeAnalysisGetMethodBody,
    CodeAnalysisGetMethodSignature,
    CodeAnalysisGetRelevantCode,
    CodeAnalysisCreateCodeMap,
    FileListFiles,
    FileOpenFile,
    FileScroll,
    FileFindFile,
    FileSearchWord,
    FileChangeWorkingDirectory,
    FileGitClone,
    LinearCreateComment,
}

/// Read-only actions available to the repository analysis agent
pub const REPO_ANALYZER_ACTIONS: &[Action] = &[
    Action::CodeAnalysisGetClassInfo,
    Action::CodeAnalysisGetMethodBody,
    Action::CodeAnalysisGetMethodSignature,
    Action::CodeAnalysisGetRelevantCode,
    Action::FileListFiles,
    Action::FileOpenFile,
    Action::FileScroll,
    Action::FileFindFile,
    Action::FileSearchWord,
];

/// Actions available to the ticket comment agent
pub const TICKET_COMMENT_ACTIONS: &[Action] = &[Action::LinearCreateComment];

const ALL_ACTIONS: &[Action] = &[
    Action::CodeAnalysisGetClassInfo,
    Action::CodeAnalysisGetMethodBody,
    Action::CodeAnalysisGetMethodSignature,
    Action::CodeAnalysisGetRelevantCode,
    Action::CodeAnalysisCreateCodeMap,
    Action::FileListFiles,
    Action::FileOpenFile,
    Action::FileScroll,
    Action::FileFindFile,
    Action::FileSearchWord,
    Action::FileChangeWorkingDirectory,
    Action::FileGitClone,
    Action::LinearCreateComment,
];

impl Action {
    /// Wire name, as presented to the model and the executor
    pub fn name(&self) -> &'static str {
        match self {
            Action::CodeAnalysisGetClassInfo => "CODE_ANALYSIS_TOOL_GET_CLASS_INFO",
            Action::CodeAnalysisGetMethodBody => "CODE_ANALYSIS_TOOL_GET_METHOD_BODY",
            Action::CodeAnalysisGetMethodSignature => "CODE_ANALYSIS_TOOL_GET_METHOD_SIGNATURE",
            Action::CodeAnalysisGetRelevantCode => "CODE_ANALYSIS_TOOL_GET_RELEVANT_CODE",
            Action::CodeAnalysisCreateCodeMap => "CODE_ANALYSIS_TOOL_CREATE_CODE_MAP",
            Action::FileListFiles => "FILETOOL_LIST_FILES",
            Action::FileOpenFile => "FILETOOL_OPEN_FILE",
            Action::FileScroll => "FILETOOL_SCROLL",
            Action::FileFindFile => "FILETOOL_FIND_FILE",
            Action::FileSearchWord => "FILETOOL_SEARCH_WORD",
            Action::FileChangeWorkingDirectory => "FILETOOL_CHANGE_WORKING_DIRECTORY",
            Action::FileGitClone => "FILETOOL_GIT_CLONE",
            Action::LinearCreateComment => "LINEAR_CREATE_LINEAR_COMMENT",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        ALL_ACTIONS.iter().copied().find(|a| a.name() == name)
    }

    pub fn app(&self) -> App {
        match self {
            Action::CodeAnalysisGetClassInfo
            | Action::CodeAnalysisGetMethodBody
            | Action::CodeAnalysisGetMethodSignature
            | Action::CodeAnalysisGetRelevantCode
            | Action::CodeAnalysisCreateCodeMap => App::CodeAnalysis,
            Action::LinearCreateComment => App::Linear,
            _ => App::FileTool,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::CodeAnalysisGetClassInfo => "Fetch information about a class in the repository.",
            Action::CodeAnalysisGetMethodBody => "Fetch the body of a method in the repository.",
            Action::CodeAnalysisGetMethodSignature => {
                "Fetch the signature of a method in the repository."
            }
            Action::CodeAnalysisGetRelevantCode => {
                "Fetch the code snippets from the repository relevant to a query."
            }
            Action::CodeAnalysisCreateCodeMap => "Build the code index for the current directory.",
            Action::FileListFiles => "List the files and directories in the current directory.",
            Action::FileOpenFile => {
                "Open a file and view its contents; only 100 lines are shown at a time."
            }
            Action::FileScroll => "Scroll the currently open file up or down.",
            Action::FileFindFile => "Find files matching a pattern in the repository.",
            Action::FileSearchWord => "Search for a word across files in the repository.",
            Action::FileChangeWorkingDirectory => "Change the current working directory.",
            Action::FileGitClone => "Clone a git repository into the current directory.",
            Action::LinearCreateComment => "Create a comment on a Linear issue.",
        }
    }

    /// JSON schema for the action's parameters
    pub fn parameters(&self) -> Value {
        match self {
            Action::CodeAnalysisGetClassInfo => object(
                json!({"class_name": string("Name of the class to look up")}),
                &["class_name"],
            ),
            Action::CodeAnalysisGetMethodBody | Action::CodeAnalysisGetMethodSignature => object(
                json!({
                    "method_name": string("Name of the method"),
                    "class_name": string("Owning class, if the method is not a free function")
                }),
                &["method_name"],
            ),
            Action::CodeAnalysisGetRelevantCode => object(
                json!({"query": string("Free-text description of the code to find")}),
                &["query"],
            ),
            Action::CodeAnalysisCreateCodeMap => object(json!({}), &[]),
            Action::FileListFiles => object(json!({}), &[]),
            Action::FileOpenFile => object(
                json!({
                    "file_path": string("Path of the file to open"),
                    "line_number": {"type": "integer", "description": "Line to start viewing from"}
                }),
                &["file_path"],
            ),
            Action::FileScroll => object(
                json!({
                    "direction": {"type": "string", "enum": ["up", "down"]},
                    "lines": {"type": "integer", "description": "Number of lines to scroll"}
                }),
                &[],
            ),
            Action::FileFindFile => object(
                json!({
                    "pattern": string("Glob pattern to match"),
                    "depth": {"type": "integer", "description": "Maximum directory depth"}
                }),
                &["pattern"],
            ),
            Action::FileSearchWord => object(
                json!({
                    "word": string("Word to search for"),
                    "pattern": string("Optional glob restricting which files are searched")
                }),
                &["word"],
            ),
            Action::FileChangeWorkingDirectory => {
                object(json!({"path": string("Directory to switch to")}), &["path"])
            }
            Action::FileGitClone => object(
                json!({"repo_name": string("Repository in owner/name form")}),
                &["repo_name"],
            ),
            Action::LinearCreateComment => object(
                json!({
                    "issue_id": string("Id of the Linear issue to comment on"),
                    "body": string("Markdown body of the comment")
                }),
                &["issue_id", "body"],
            ),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn string(description: &str) -> Value {
    json!({"type": "string", "description": description})
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
