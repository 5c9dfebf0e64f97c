//! Questions the agents put to their brains

use std::fmt::Write as _;

/// Critic answer meaning the class needs no changes
pub(crate) const NOT_FOUND: &str = "No suggestions found";

pub(crate) fn critic(code: &str, imperfections: &str) -> String {
    let mut prompt = format!(
        "Review the following Java class and list the most valuable improvements.\n\
         Write exactly one suggestion per line, without numbering or extra text.\n\
         If the class needs no changes, answer exactly \"{NOT_FOUND}\".\n\n\
         ```java\n{code}\n```\n"
    );
    let defects: Vec<&str> = imperfections
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if !defects.is_empty() {
        prompt.push_str("\nStatic analysis reported these imperfections:\n");
        for defect in defects {
            let _ = writeln!(prompt, "- {defect}");
        }
    }
    prompt
}

pub(crate) fn fixer(name: &str, code: &str, suggestions: &str, example: Option<&str>) -> String {
    let mut prompt = format!(
        "Fix '{name}' code based on the listed suggestions.\n\n\
         Code:\n```java\n{code}\n\n```\n\n\
         Suggestions:\n```suggestion\n{suggestions}\n\n```\n"
    );
    if let Some(example) = example {
        let _ = write!(
            prompt,
            "Follow the style of this example class:\n```example\n{example}\n```\n"
        );
    }
    prompt.push_str(
        "Do not rename class names.\n\
         Return only the corrected Java code.\n\
         Do not include explanations, comments, or any extra text.\n",
    );
    prompt
}

pub(crate) fn reviewer(
    command: &str,
    workdir: &str,
    status: &str,
    stdout: &str,
    stderr: &str,
) -> String {
    format!(
        "The command `{command}` failed in `{workdir}` ({status}).\n\n\
         Stdout:\n```\n{stdout}\n```\n\n\
         Stderr:\n```\n{stderr}\n```\n\n\
         List the changes needed to make the command succeed.\n\
         Write one suggestion per line in the form `<path to file>: <suggestion>`.\n\
         Do not include any other text.\n"
    )
}
