// SPDX-License-Identifier: GPL-3.0-only

use cosmic::widget::menu::{Item as MenuItem, ItemHeight, ItemWidth};
use cosmic::{Element, app::Core, widget::responsive_menu_bar};
use std::sync::LazyLock;

use super::{ContextPage, Message};
use crate::config::AppTheme;
use crate::fl;

static MENU_ID: LazyLock<cosmic::widget::Id> =
    LazyLock::new(|| cosmic::widget::Id::new("responsive-menu"));

pub fn menu_bar<'a>(core: &Core) -> Element<'a, Message> {
    let mut view_items: Vec<_> = AppTheme::ALL
        .into_iter()
        .map(|theme| MenuItem::Button(theme_label(theme), None, MenuAction::Theme(theme)))
        .collect();
    view_items.push(MenuItem::Divider);
    view_items.push(MenuItem::Button(fl!("about"), None, MenuAction::About));

    responsive_menu_bar()
        .item_height(ItemHeight::Dynamic(40))
        .item_width(ItemWidth::Uniform(240))
        .spacing(4.0)
        .into_element(
            core,
            &std::collections::HashMap::new(),
            MENU_ID.clone(),
            Message::Surface,
            vec![(fl!("view"), view_items)],
        )
}

fn theme_label(theme: AppTheme) -> String {
    match theme {
        AppTheme::System => fl!("theme-system"),
        AppTheme::Dark => fl!("theme-dark"),
        AppTheme::Light => fl!("theme-light"),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuAction {
    Theme(AppTheme),
    About,
}

impl cosmic::widget::menu::Action for MenuAction {
    type Message = Message;

    fn message(&self) -> Self::Message {
        match self {
            MenuAction::Theme(theme) => Message::SetAppTheme(*theme),
            MenuAction::About => Message::ToggleContextPage(ContextPage::About),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic::widget::menu::Action;

    #[test]
    fn test_theme_actions_set_the_theme() {
        for theme in AppTheme::ALL {
            assert!(matches!(
                MenuAction::Theme(theme).message(),
                Message::SetAppTheme(chosen) if chosen == theme
            ));
        }
        assert!(matches!(
            MenuAction::About.message(),
            Message::ToggleContextPage(ContextPage::About)
        ));
    }
}
