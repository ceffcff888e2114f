// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! A single column with the image preview, the recognized text and the two
//! action buttons. The take-image source menu is an overlay above the
//! buttons, and toasts are layered on top of everything.

use crate::acquisition::ImageSource;
use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::fl;
use cosmic::Element;
use cosmic::iced::widget::text_editor;
use cosmic::iced::{Alignment, Background, Color, Length};
use cosmic::widget;

/// Container style for the source menu panel
fn menu_panel_style(theme: &cosmic::Theme) -> widget::container::Style {
    let cosmic = theme.cosmic();
    let bg = cosmic.bg_color();
    widget::container::Style {
        background: Some(Background::Color(Color::from_rgba(
            bg.red,
            bg.green,
            bg.blue,
            ui::OVERLAY_BACKGROUND_ALPHA,
        ))),
        border: cosmic::iced::Border {
            radius: cosmic.corner_radii.radius_s.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let content = widget::column()
            .push(self.build_preview())
            .push(self.build_status_line())
            .push(self.build_text_area())
            .push(self.build_action_buttons())
            .spacing(spacing.space_s)
            .padding(spacing.space_s)
            .width(Length::Fill)
            .height(Length::Fill);

        let mut main_stack = cosmic::iced::widget::stack![content];

        if self.controller.menu_open() {
            main_stack = main_stack.push(self.build_source_menu());
        }

        widget::toaster(
            &self.toasts,
            main_stack.width(Length::Fill).height(Length::Fill),
        )
    }

    /// Preview of the active image, or a placeholder
    fn build_preview(&self) -> Element<'_, Message> {
        let inner: Element<'_, Message> = match &self.preview {
            Some(handle) => widget::image(handle.clone())
                .content_fit(cosmic::iced::ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None if self.controller.image().is_some() => widget::text::body(
                self.controller
                    .image()
                    .map(|image| image.to_string())
                    .unwrap_or_default(),
            )
            .into(),
            None => widget::text::body(fl!("no-image")).into(),
        };

        widget::container(inner)
            .center_x(Length::Fill)
            .center_y(Length::Fixed(ui::PREVIEW_MAX_HEIGHT))
            .class(cosmic::style::Container::Card)
            .into()
    }

    /// "Capturing…" or "Recognizing…" while work is in flight
    fn build_status_line(&self) -> Element<'_, Message> {
        let status = if self.controller.is_capturing() {
            fl!("capturing")
        } else if self.controller.is_recognizing() {
            fl!("recognizing")
        } else {
            String::new()
        };
        widget::text::caption(status).into()
    }

    /// Read-only, selectable recognized text
    fn build_text_area(&self) -> Element<'_, Message> {
        text_editor(&self.text_content)
            .placeholder(fl!("recognized-text-placeholder"))
            .on_action(Message::TextAction)
            .height(Length::Fill)
            .into()
    }

    fn build_action_buttons(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        widget::row()
            .push(widget::button::standard(fl!("take-image")).on_press(Message::TakeImage))
            .push(widget::Space::new(Length::Fill, Length::Shrink))
            .push(widget::button::suggested(fl!("translate")).on_press(Message::Translate))
            .spacing(spacing.space_s)
            .align_y(Alignment::Center)
            .width(Length::Fill)
            .into()
    }

    /// Source menu anchored above the take-image button
    ///
    /// Clicking outside the panel closes it.
    fn build_source_menu(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let mut column = widget::column()
            .spacing(spacing.space_xxs)
            .padding(spacing.space_xs);

        for source in ImageSource::ALL {
            let label = match source {
                ImageSource::Camera => fl!("menu-camera"),
                ImageSource::Gallery => fl!("menu-gallery"),
            };
            column = column.push(
                widget::button::text(label)
                    .on_press(Message::SourceChosen(source))
                    .width(Length::Fixed(ui::MENU_ITEM_WIDTH)),
            );
        }

        let menu_panel = widget::mouse_area(widget::container(column).style(menu_panel_style))
            .on_press(Message::Noop);

        // Bottom-left, just above the button row
        let menu_positioned = widget::container(menu_panel)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(cosmic::iced::alignment::Horizontal::Left)
            .align_y(cosmic::iced::alignment::Vertical::Bottom)
            .padding([0, 0, spacing.space_xxl, spacing.space_s]);

        widget::mouse_area(menu_positioned)
            .on_press(Message::CloseSourceMenu)
            .into()
    }
}
