//! Scripted verse feed
//!
//! The scene is driven by an ordered list of verse blocks, each a reference
//! label plus display lines. Blocks are consumed strictly in order, one line
//! per dwell period; a `walk_then_run_on_last_line` block flips the scene to
//! run mode exactly when its final line appears. An optional JSON override
//! replaces the built-in script; anything malformed falls back silently.

use serde::{Deserialize, Serialize};

use crate::consts::{INTRO_DWELL_SECS, LINE_DWELL_SECS};

const INTRO_REF: &str = "Happy New Year 2026";
const INTRO_LINE: &str = "Brothers and Sisters";

/// How a block drives locomotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockMode {
    Walk,
    WalkThenRunOnLastLine,
}

/// One passage of the crawl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerseBlock {
    #[serde(rename = "ref")]
    pub reference: String,
    pub lines: Vec<String>,
    pub mode: BlockMode,
}

/// The built-in script shown when no override is provided.
pub fn default_script() -> Vec<VerseBlock> {
    vec![
        VerseBlock {
            reference: "Psalm 23:5 (NIV)".into(),
            lines: vec![
                "You prepare a table before me".into(),
                "in the presence of my enemies.".into(),
                "my cup overflows".into(),
            ],
            mode: BlockMode::Walk,
        },
        VerseBlock {
            reference: "Philippians 3:13\u{2013}14 (NIV)".into(),
            lines: vec![
                "Brothers and sisters, I do not consider myself yet to have taken hold of it.".into(),
                "But one thing I do: Forgetting what is behind and straining toward what is ahead,"
                    .into(),
                "I press on toward the goal to win the prize".into(),
                "for which God has called me heavenward in Christ Jesus.".into(),
            ],
            mode: BlockMode::WalkThenRunOnLastLine,
        },
    ]
}

/// Parse an override feed. Only a non-empty JSON array of blocks is accepted;
/// everything else logs and yields None so the caller keeps the default.
pub fn parse_override(json: &str) -> Option<Vec<VerseBlock>> {
    match serde_json::from_str::<Vec<VerseBlock>>(json) {
        Ok(blocks) if !blocks.is_empty() => Some(blocks),
        Ok(_) => {
            log::warn!("override script is empty; using the default");
            None
        }
        Err(err) => {
            log::warn!("override script is invalid ({err}); using the default");
            None
        }
    }
}

/// What the player asks the rest of the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCue {
    ShowText { reference: String, line: String },
    EnterWalk,
    EnterRun,
    /// The crawl is starting: begin greeting/music playback.
    BeginAudio,
    Finished,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Intro { left: f32 },
    Line { block: usize, line: usize, left: f32 },
    Done,
}

/// Tick-driven consumer of the verse feed.
#[derive(Debug, Clone)]
pub struct ScriptPlayer {
    blocks: Vec<VerseBlock>,
    phase: Phase,
    started: bool,
    audio_started: bool,
    finished_emitted: bool,
}

impl ScriptPlayer {
    pub fn new(blocks: Vec<VerseBlock>) -> Self {
        Self {
            blocks,
            phase: Phase::Intro {
                left: INTRO_DWELL_SECS,
            },
            started: false,
            audio_started: false,
            finished_emitted: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Advance the crawl. Returns the cues that came due this tick, in the
    /// order they must be applied (mode changes before the text they go with).
    pub fn advance(&mut self, dt: f32) -> Vec<ScriptCue> {
        let mut cues = Vec::new();

        if !self.started {
            self.started = true;
            cues.push(ScriptCue::EnterWalk);
            cues.push(ScriptCue::ShowText {
                reference: INTRO_REF.into(),
                line: INTRO_LINE.into(),
            });
        }

        let mut remaining = dt;
        loop {
            match self.phase {
                Phase::Intro { left } => {
                    if left > remaining {
                        self.phase = Phase::Intro {
                            left: left - remaining,
                        };
                        break;
                    }
                    remaining -= left;
                    self.advance_position(&mut cues);
                }
                Phase::Line { block, line, left } => {
                    if left > remaining {
                        self.phase = Phase::Line {
                            block,
                            line,
                            left: left - remaining,
                        };
                        break;
                    }
                    remaining -= left;
                    self.advance_position(&mut cues);
                }
                Phase::Done => {
                    if !self.finished_emitted {
                        self.finished_emitted = true;
                        cues.push(ScriptCue::Finished);
                    }
                    break;
                }
            }
        }
        cues
    }

    /// Move to the next line (or finish) and emit its cues.
    fn advance_position(&mut self, cues: &mut Vec<ScriptCue>) {
        let next = match self.phase {
            Phase::Intro { .. } => self.find_line(0, 0),
            Phase::Line { block, line, .. } => self.find_line(block, line + 1),
            Phase::Done => None,
        };
        match next {
            Some((block_idx, line_idx)) => self.begin_line(block_idx, line_idx, cues),
            None => self.phase = Phase::Done,
        }
    }

    /// First existing line at or after (block, line), skipping empty blocks.
    fn find_line(&self, mut block: usize, mut line: usize) -> Option<(usize, usize)> {
        while block < self.blocks.len() {
            if line < self.blocks[block].lines.len() {
                return Some((block, line));
            }
            block += 1;
            line = 0;
        }
        None
    }

    fn begin_line(&mut self, block_idx: usize, line_idx: usize, cues: &mut Vec<ScriptCue>) {
        let block = &self.blocks[block_idx];

        // Set the block's base mode once, on its first line, so the walk loop
        // doesn't restart for every line.
        if line_idx == 0 {
            cues.push(ScriptCue::EnterWalk);
        }
        if !self.audio_started {
            self.audio_started = true;
            cues.push(ScriptCue::BeginAudio);
        }
        let is_last = line_idx + 1 == block.lines.len();
        if is_last && block.mode == BlockMode::WalkThenRunOnLastLine {
            cues.push(ScriptCue::EnterRun);
        }
        cues.push(ScriptCue::ShowText {
            reference: block.reference.clone(),
            line: block.lines[line_idx].clone(),
        });
        self.phase = Phase::Line {
            block: block_idx,
            line: line_idx,
            left: LINE_DWELL_SECS,
        };
    }
}
