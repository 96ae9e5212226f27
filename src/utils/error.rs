use crate::league::model::{MatchId, Participant, PlayerId};

/// Broad classes of league failures, used by callers that only care about the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeagueError {
    GuestRatingOutOfRange(String),
    SkillOutOfRange { skill: String, value: u8 },
    OddParticipantCount(usize),
    WrongTeamSize { team_a: usize, team_b: usize },
    DuplicateParticipant(String),
    InvalidColor(String),
    TaglineTooLong(usize),
    CounterOverflow { player_id: PlayerId, counter: &'static str },
    MatchNotFound(MatchId),
    NoProfile(PlayerId),
    UnknownParticipant(String),
    NotParticipant(Participant),
    NotRegistered(PlayerId),
    ResultAlreadyRecorded(MatchId),
    AlreadyVoted(MatchId),
    VoteClosed(MatchId),
    StatsAlreadyEntered { match_id: MatchId, player_id: PlayerId },
    LedgerNotEmpty,
    Internal(String),
}

impl LeagueError {
    pub fn kind(&self) -> ErrorKind {
        use LeagueError::*;
        match self {
            GuestRatingOutOfRange(_)
            | SkillOutOfRange { .. }
            | OddParticipantCount(_)
            | WrongTeamSize { .. }
            | DuplicateParticipant(_)
            | InvalidColor(_)
            | TaglineTooLong(_)
            | CounterOverflow { .. } => ErrorKind::Validation,
            MatchNotFound(_)
            | NoProfile(_)
            | UnknownParticipant(_)
            | NotParticipant(_)
            | NotRegistered(_) => ErrorKind::NotFound,
            ResultAlreadyRecorded(_)
            | AlreadyVoted(_)
            | VoteClosed(_)
            | StatsAlreadyEntered { .. }
            | LedgerNotEmpty => ErrorKind::Conflict,
            Internal(_) => ErrorKind::Internal,
        }
    }
}

impl std::fmt::Display for LeagueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LeagueError::*;
        match self {
            GuestRatingOutOfRange(raw) => write!(
                f,
                "A guest rating must be between 1 and 10 (got {}).",
                raw
            ),
            SkillOutOfRange { skill, value } => {
                write!(f, "{} must be between 0 and 10 (got {}).", skill, value)
            }
            OddParticipantCount(count) => write!(
                f,
                "Teams can only be balanced from an even number of players (got {}).",
                count
            ),
            WrongTeamSize { team_a, team_b } => write!(
                f,
                "A match needs two teams of 5 players (got {} and {}).",
                team_a, team_b
            ),
            DuplicateParticipant(name) => {
                write!(f, "{} was entered more than once for this match.", name)
            }
            InvalidColor(raw) => write!(f, "`{}` is not a #RRGGBB color.", raw),
            TaglineTooLong(len) => write!(
                f,
                "The tagline is {} characters long, the limit is 100.",
                len
            ),
            CounterOverflow { player_id, counter } => write!(
                f,
                "The {} total of <@{}> cannot grow any further.",
                counter, player_id
            ),
            MatchNotFound(id) => write!(f, "Match #{} does not exist.", id),
            NoProfile(id) => write!(f, "<@{}> has no profile yet (/set_player).", id),
            UnknownParticipant(token) => write!(
                f,
                "Player `{}` is not registered.\n- Use `/set_player` to register them, or\n- use `*** 7` for a guest (*** followed by a rating).",
                token
            ),
            NotParticipant(participant) => {
                write!(f, "{} did not play in this match.", participant)
            }
            NotRegistered(id) => write!(f, "<@{}> is not registered yet (/set_player).", id),
            ResultAlreadyRecorded(id) => {
                write!(f, "The result of match #{} is already recorded.", id)
            }
            AlreadyVoted(id) => write!(f, "You already voted for the MVP of match #{}.", id),
            VoteClosed(id) => write!(f, "The MVP vote of match #{} is already closed.", id),
            StatsAlreadyEntered {
                match_id,
                player_id,
            } => write!(
                f,
                "Stats for <@{}> were already entered for match #{}.",
                player_id, match_id
            ),
            LedgerNotEmpty => write!(
                f,
                "The league already holds players or matches, refusing to import over them."
            ),
            Internal(reason) => write!(f, "Internal league error: {}", reason),
        }
    }
}

impl std::error::Error for LeagueError {}
