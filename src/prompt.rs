use crate::models::MemeTemplate;
use std::fmt::Write;

/// Builds the completion prompt for `template`.
///
/// The reply format (`Caption[<n>]: ...` lines followed by one
/// `Invitation: ...` line) is what [`crate::parser`] extracts from.
pub fn caption_prompt(template: &MemeTemplate) -> String {
    let boxes = template.box_count.max(1);
    let description = template.description().unwrap_or("no description available");

    let mut prompt = format!(
        "You write captions for the meme template \"{name}\".\n\
         About this template: {description}\n\
         The template has {boxes} text {box_word}.\n\n\
         Write exactly {boxes} short, funny {caption_word} that fit the template, one per line, \
         numbered in this exact form:\n",
        name = template.name,
        box_word = if boxes == 1 { "box" } else { "boxes" },
        caption_word = if boxes == 1 { "caption" } else { "captions" },
    );
    for n in 1..=boxes {
        let _ = writeln!(prompt, "Caption[{n}]: <caption text>");
    }
    prompt.push_str(
        "\nThen write one sentence inviting the reader to share this meme with their friends, \
         on its own line in this exact form:\n\
         Invitation: <invitation text>\n\n\
         Do not add anything else.",
    );
    prompt
}
