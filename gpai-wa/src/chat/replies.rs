//! User-facing message copy for the WhatsApp assistant
//!
//! All outbound text lives here so the conversation voice stays in one
//! place. Formatting follows WhatsApp conventions (*bold*).

use gpai_common::models::CourseEntry;

pub const REGISTER_SUCCESS: &str = "✅ You're registered! Welcome to GPAi.\n\nTo start, send me a clear picture of your results or reply 'calculate' to enter them manually.";

pub const REGISTER_PROMPT: &str = "Welcome to GPAi! It looks like you're new here.\n\nPlease reply with 'register' to create a free account and start tracking your GPA.";

pub const GREETING: &str = "Hi there! Send \"calculate gpa\" to get started, or just send me a picture of your results.";

pub const IMAGE_ACK: &str = "Got it! 📸 Analyzing your results sheet now... This might take a moment. 🔬";

pub const ASK_COURSE_COUNT: &str = "Welcome back! How many courses would you like to calculate?";

pub const INVALID_COURSE_COUNT: &str = "Please enter a valid number. How many courses?";

pub const COURSE_FORMAT_ERROR: &str = "Hmm, that format doesn't look right. Please use:\n\n*Course Code, Units, Score*";

pub const OCR_DECLINED: &str = "No problem. Let's start over. Send 'calculate' or send a new image.";

pub const OCR_REASK: &str = "Please reply *yes* to calculate with these courses, or *no* to start over.";

pub const OCR_READ_FAILED: &str = "Sorry, I couldn't read the text from that image. Please try a clearer picture.";

pub const OCR_NO_COURSES: &str = "I found text, but couldn't identify any courses. Try entering them manually by sending 'calculate'.";

pub const SAVE_FAILED: &str = "Sorry, something went wrong saving your results. Please try again.";

pub const CGPA_EMPTY: &str = "You don't have any saved results yet. Send 'calculate' or a picture of your results to get started.";

pub fn ask_first_course(total: u32) -> String {
    format!(
        "Great! Let's get the details for your {} courses.\n\nPlease send the details for Course 1 in this format:\n\n*Course Code, Units, Score*",
        total
    )
}

pub fn course_added(name: &str, next_index: usize) -> String {
    format!(
        "✅ Got it! *{}* added.\n\nPlease send the details for Course {}:\n\n*Course Code, Units, Score*",
        name, next_index
    )
}

pub fn manual_complete(gpa: &str) -> String {
    format!(
        "🎉 Calculation complete and results saved!\n\nYour GPA for this semester is: *{}*",
        gpa
    )
}

pub fn image_complete(gpa: &str) -> String {
    format!(
        "🎉 Perfect! Your results are saved. Your GPA from the image is: *{}*",
        gpa
    )
}

pub fn ai_analysis(summary: &str) -> String {
    format!("🤖 *GPAi's Analysis:*\n\n{}", summary)
}

pub fn ocr_confirm(courses: &[CourseEntry]) -> String {
    let mut message = String::from("Okay, here's what I found. Does this look correct?\n\n");
    for course in courses {
        message.push_str(&format!(
            "- *{}*, {} Units, Score: {}\n",
            course.name, course.units, course.score
        ));
    }
    message.push_str("\nReply *yes* to calculate, or *no* to start over.");
    message
}

pub fn cgpa_report(semester_count: usize, course_count: usize, cgpa: &str) -> String {
    format!(
        "📊 Across your {} saved semester(s) and {} course(s), your CGPA is: *{}*",
        semester_count, course_count, cgpa
    )
}
