mod interaction;
mod user;

pub use interaction::{
    DailyPick, EndReason, FriendRequest, FriendRequestStatus, Like, Match, MatchState,
    Notification, NotificationKind, Standout, SwipeDirection, UndoState,
};
pub use user::{
    AgeRange, CommunicationStyle, Dealbreakers, DealbreakerCategory, DepthPreference, Drinking,
    Education, Gender, KidsStance, LookingFor, MessagingFrequency, PacePreferences, Smoking,
    TimeToFirstDate, User, UserState,
};
