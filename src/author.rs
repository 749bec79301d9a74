//! Invoking user, with guild membership details when available

use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use serenity::model::guild::{Guild, Member, Role};
use serenity::model::id::{GuildId, RoleId};
use serenity::model::user::User;
use serenity::model::Timestamp;

use crate::core::Result;
use crate::gateway::Gateway;

/// Either a bare user (direct messages) or a guild member.
///
/// Dereferences to the underlying [`User`].
#[derive(Debug, Clone)]
pub struct Author {
    pub user: User,
    pub is_member: bool,
    /// Cached guild, if the platform client has it
    pub guild: Option<Guild>,
    pub joined_at: Option<DateTime<Utc>>,
    pub nick: Option<String>,
    pub deaf: bool,
    pub mute: bool,
    pub roles: Vec<Role>,
    pub premium_since: Option<DateTime<Utc>>,
    /// Guild-specific avatar hash
    pub avatar: Option<String>,
}

impl Author {
    pub fn from_user(user: User) -> Self {
        Self {
            user,
            is_member: false,
            guild: None,
            joined_at: None,
            nick: None,
            deaf: false,
            mute: false,
            roles: Vec::new(),
            premium_since: None,
            avatar: None,
        }
    }

    /// Build from a member of an already looked-up guild, resolving its roles.
    ///
    /// Failing to fetch the role list is an error.
    pub async fn from_member(
        gateway: &dyn Gateway,
        guild_id: GuildId,
        guild: Option<Guild>,
        member: Member,
    ) -> Result<Self> {
        let guild_roles = gateway.guild_roles(guild_id).await?;
        let roles = resolve_roles(&member.roles, &guild_roles);

        Ok(Self {
            is_member: true,
            guild,
            joined_at: member.joined_at.and_then(to_utc),
            nick: member.nick,
            deaf: member.deaf,
            mute: member.mute,
            roles,
            premium_since: member.premium_since.and_then(to_utc),
            avatar: member.avatar,
            user: member.user,
        })
    }

    /// Nickname in the guild, falling back to the account name
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.name)
    }

    pub fn has_role(&self, role_id: RoleId) -> bool {
        self.roles.iter().any(|role| role.id == role_id)
    }
}

impl Deref for Author {
    type Target = User;

    fn deref(&self) -> &User {
        &self.user
    }
}

/// Roles in member order; IDs missing from the guild are dropped
pub fn resolve_roles(role_ids: &[RoleId], guild_roles: &HashMap<RoleId, Role>) -> Vec<Role> {
    role_ids
        .iter()
        .filter_map(|id| guild_roles.get(id).cloned())
        .collect()
}

fn to_utc(timestamp: Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_member, test_role, test_user, FakeGateway};
    use serenity::model::id::UserId;

    #[test]
    fn test_author_from_user() {
        let author = Author::from_user(test_user(1, "ferris"));
        assert!(!author.is_member);
        assert!(author.roles.is_empty());
        assert_eq!(author.id, UserId(1));
        assert_eq!(author.display_name(), "ferris");
    }

    #[tokio::test]
    async fn test_author_from_member() {
        let gateway = FakeGateway::default();
        let member = test_member(7, 2, "crab", Some("Captain"), &[10, 11]);

        let author = Author::from_member(&gateway, GuildId(7), None, member).await.unwrap();
        assert!(author.is_member);
        assert!(author.guild.is_none());
        assert_eq!(author.display_name(), "Captain");
        assert!(author.joined_at.is_some());
        // The fake guild has no roles, so every member role is dropped
        assert!(author.roles.is_empty());
    }

    #[tokio::test]
    async fn test_author_from_member_role_lookup_fails() {
        let gateway = FakeGateway::failing_roles();
        let member = test_member(7, 2, "crab", None, &[]);

        assert!(Author::from_member(&gateway, GuildId(7), None, member).await.is_err());
    }

    #[tokio::test]
    async fn test_author_roles_keep_known_guild_roles() {
        let gateway = FakeGateway::default().with_role(test_role(7, 10, "Moderator"));
        let member = test_member(7, 2, "crab", None, &[10, 11]);

        let author = Author::from_member(&gateway, GuildId(7), None, member).await.unwrap();
        let ids: Vec<RoleId> = author.roles.iter().map(|role| role.id).collect();
        assert_eq!(ids, vec![RoleId(10)]);
        assert_eq!(author.roles[0].name, "Moderator");
        assert!(author.has_role(RoleId(10)));
        assert!(!author.has_role(RoleId(11)));
    }

    #[test]
    fn test_resolve_roles_follows_member_order() {
        let guild_roles: HashMap<RoleId, Role> = [test_role(7, 1, "a"), test_role(7, 2, "b"), test_role(7, 3, "c")]
            .into_iter()
            .map(|role| (role.id, role))
            .collect();

        let resolved = resolve_roles(&[RoleId(3), RoleId(9), RoleId(1)], &guild_roles);
        let names: Vec<&str> = resolved.iter().map(|role| role.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_resolve_roles_empty_guild() {
        let resolved = resolve_roles(&[RoleId(1), RoleId(2)], &HashMap::new());
        assert!(resolved.is_empty());
    }
}
