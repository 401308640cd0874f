//! Prompt text sent to the vision model.

pub const SYSTEM: &str = "You are a careful facial analysis assistant for an identity \
verification system. Follow the output format exactly and never add commentary.";

/// Binary presence question. The model must answer with a single word.
pub const PRESENCE: &str = "Is there exactly one clear, real human face in this image? \
Answer NO if the lighting is poor, if more than one face is visible, if the face is \
partially hidden, blurred, turned away or too small, or if the image shows a screen, \
photo of a photo, drawing or mask. Answer with a single word: YES or NO.";

/// Fixed-structure description used both at enrollment and at login.
pub const DESCRIBE: &str = "Describe the face in this image in detail so that it can later \
be compared against other descriptions of the same person. Use exactly these sections:\n\
1. Face shape\n\
2. Eyes: size, shape, color, spacing\n\
3. Nose\n\
4. Mouth and lips\n\
5. Eyebrows\n\
6. Chin and jawline\n\
7. Distinguishing features: marks, scars, moles, glasses, facial hair\n\
Describe only stable physical features. Do not mention clothing, background, \
expression or lighting.";

/// Comparison prompt; the two descriptions are appended by the caller.
pub fn compare(submitted: &str, stored: &str) -> String {
  format!(
    "Compare the two face descriptions below and estimate how likely it is that they \
describe the same person. Weigh every section: face shape, eyes, nose, mouth and lips, \
eyebrows, chin and jawline, distinguishing features. Be strict rather than lenient: a \
false acceptance is far worse than a false rejection, so any clear contradiction in a \
stable feature must lower the score substantially.\n\n\
Respond with a single integer from 0 to 100 and nothing else.\n\n\
DESCRIPTION A (submitted):\n{submitted}\n\n\
DESCRIPTION B (enrolled):\n{stored}\n"
  )
}
